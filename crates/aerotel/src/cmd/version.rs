use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("aerotel {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: aerotel");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("AEROTEL_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "frame: start=0x{:02X} end=0x{:02X} record={}B",
        aerotel_frame::START_BYTE,
        aerotel_frame::END_BYTE,
        aerotel_frame::RECORD_SIZE
    );
    println!(
        "features: ingest={}, async={}, cli=true",
        cfg!(feature = "ingest"),
        cfg!(feature = "async")
    );

    Ok(SUCCESS)
}
