use serde::Serialize;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Debug, Serialize)]
struct BuildInfo {
    name: &'static str,
    version: &'static str,
    target: &'static str,
    profile: &'static str,
    target_os: &'static str,
    target_arch: &'static str,
    rustc: &'static str,
    git_hash: &'static str,
}

fn build_info() -> BuildInfo {
    BuildInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        target: option_env!("STREAMPRIMS_BUILD_TARGET").unwrap_or("unknown"),
        profile: option_env!("STREAMPRIMS_BUILD_PROFILE").unwrap_or("unknown"),
        target_os: std::env::consts::OS,
        target_arch: std::env::consts::ARCH,
        rustc: option_env!("RUSTC_VERSION").unwrap_or("unknown"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
    }
}

pub fn run(args: VersionArgs, format: OutputFormat) -> CliResult<i32> {
    let info = build_info();

    if let OutputFormat::Json = format {
        let rendered = if args.extended {
            serde_json::to_string(&info)
        } else {
            serde_json::to_string(&serde_json::json!({
                "name": info.name,
                "version": info.version,
            }))
        };
        println!("{}", rendered.unwrap_or_else(|_| "{}".to_string()));
        return Ok(SUCCESS);
    }

    if !args.extended {
        println!("{} {}", info.name, info.version);
        return Ok(SUCCESS);
    }

    println!("name: {}", info.name);
    println!("version: {}", info.version);
    println!("target: {}", info.target);
    println!("profile: {}", info.profile);
    println!("target_os: {}", info.target_os);
    println!("target_arch: {}", info.target_arch);
    println!("rustc: {}", info.rustc);
    println!("git_hash: {}", info.git_hash);

    Ok(SUCCESS)
}
