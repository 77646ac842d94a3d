use crate::config::BuildSection;
use crate::utils::shell::StepCommand;

/// The delegated build: every workspace member, library and binary targets
/// only, release profile, verbose, with the configured features enabled.
pub fn build_command(section: &BuildSection) -> StepCommand {
    if let Some(args) = &section.args {
        return StepCommand::new(section.program.clone(), args.clone());
    }

    let mut args: Vec<String> = [
        "build",
        "--workspace",
        "--lib",
        "--bins",
        "--release",
        "--verbose",
    ]
    .into_iter()
    .map(str::to_string)
    .collect();
    if !section.features.is_empty() {
        args.push("--features".to_string());
        args.push(section.features.join(","));
    }

    StepCommand::new(section.program.clone(), args)
}
