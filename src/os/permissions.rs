use std::path::{Path, PathBuf};

use crate::config::PermissionSection;
use crate::utils::shell::{self, StepCommand};

/// Recursive mode reset of the build output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionReset {
    pub directory: PathBuf,
    pub command: StepCommand,
}

impl PermissionReset {
    /// Plans the reset for `root`; `sudo_available` decides elevation when
    /// the config asks for it.
    pub fn plan(root: &Path, section: &PermissionSection, sudo_available: bool) -> Self {
        let directory = root.join(&section.directory);
        let args = vec![
            "-R".to_string(),
            section.mode.clone(),
            directory.to_string_lossy().into_owned(),
        ];
        if section.elevate && !sudo_available {
            tracing::warn!(
                directory = %directory.display(),
                "sudo is not available; resetting permissions without elevation"
            );
        }
        let elevate = section.elevate && sudo_available;
        let command = with_optional_sudo(&section.program, args, elevate);
        Self { directory, command }
    }

    /// Only a missing path has nothing to reset; files and dangling links
    /// still go to the permission tool.
    pub fn is_needed(&self) -> bool {
        self.directory.symlink_metadata().is_ok()
    }
}

pub fn sudo_available() -> bool {
    !cfg!(windows) && shell::command_exists("sudo")
}

fn with_optional_sudo(executable: &str, args: Vec<String>, elevate: bool) -> StepCommand {
    if !elevate {
        return StepCommand::new(executable.to_string(), args);
    }

    let mut sudo_args = Vec::with_capacity(args.len() + 1);
    sudo_args.push(executable.to_string());
    sudo_args.extend(args);
    StepCommand::new("sudo", sudo_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
        }
    }

    fn plan_capturing_log(section: &PermissionSection, sudo: bool) -> (PermissionReset, String) {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let reset = tracing::subscriber::with_default(subscriber, || {
            PermissionReset::plan(Path::new("/work"), section, sudo)
        });
        (reset, log.text())
    }

    #[test]
    fn elevated_plan_prefixes_sudo() {
        let reset = PermissionReset::plan(Path::new("/work"), &PermissionSection::default(), true);

        assert_eq!(reset.directory, PathBuf::from("/work/target"));
        assert_eq!(reset.command.program, "sudo");
        assert_eq!(reset.command.args, vec!["chmod", "-R", "777", "/work/target"]);
    }

    #[test]
    fn elevation_skipped_without_sudo_or_when_disabled() {
        let reset = PermissionReset::plan(Path::new("/work"), &PermissionSection::default(), false);
        assert_eq!(reset.command.program, "chmod");

        let section = PermissionSection {
            elevate: false,
            ..PermissionSection::default()
        };
        let reset = PermissionReset::plan(Path::new("/work"), &section, true);
        assert_eq!(reset.command.program, "chmod");
        assert_eq!(reset.command.args, vec!["-R", "777", "/work/target"]);
    }

    #[test]
    fn missing_sudo_warns_when_elevation_requested() {
        let (reset, log) = plan_capturing_log(&PermissionSection::default(), false);
        assert_eq!(reset.command.program, "chmod");
        assert!(log.contains("WARN"));
        assert!(log.contains("sudo is not available"));
    }

    #[test]
    fn no_warning_when_elevated_or_not_requested() {
        let (_, log) = plan_capturing_log(&PermissionSection::default(), true);
        assert!(log.is_empty());

        let section = PermissionSection {
            elevate: false,
            ..PermissionSection::default()
        };
        let (_, log) = plan_capturing_log(&section, false);
        assert!(log.is_empty());
    }

    #[test]
    fn regular_file_output_path_is_still_reset() {
        let tmp = tempdir().expect("tempdir");
        std::fs::write(tmp.path().join("target"), b"stale").expect("target file");

        let reset = PermissionReset::plan(tmp.path(), &PermissionSection::default(), false);
        assert!(reset.is_needed());
    }

    #[test]
    fn missing_path_needs_no_reset() {
        let tmp = tempdir().expect("tempdir");
        let reset = PermissionReset::plan(tmp.path(), &PermissionSection::default(), false);
        assert!(!reset.is_needed());

        std::fs::create_dir(tmp.path().join("target")).expect("target dir");
        assert!(reset.is_needed());
    }
}
