// Backend launch planning
// Picks between the dev script and the packaged executable

use crate::models::{LaunchPlan, Settings};
use std::path::{Path, PathBuf};

#[cfg(windows)]
use std::os::windows::process::CommandExt;

#[cfg(windows)]
pub(crate) const CREATE_NO_WINDOW: u32 = 0x08000000;

pub const BACKEND_DIR_NAME: &str = "backend";
pub const BACKEND_SCRIPT: &str = "app.py";

#[cfg(target_os = "windows")]
pub const PACKAGED_BACKEND_EXECUTABLE: &str = "app.exe";

#[cfg(not(target_os = "windows"))]
pub const PACKAGED_BACKEND_EXECUTABLE: &str = "app";

pub fn get_python_path() -> String {
    #[cfg(target_os = "windows")]
    let paths = ["python", "python3", "py"];

    #[cfg(not(target_os = "windows"))]
    let paths = ["python3", "python"];

    for path in paths {
        let mut cmd = std::process::Command::new(path);
        cmd.arg("--version");

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        if cmd.output().is_ok() {
            return path.to_string();
        }
    }

    "python".to_string()
}

/// Get the path to the backend script directory
pub fn get_backend_dir() -> PathBuf {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let backend_dir = exe_dir.join(BACKEND_DIR_NAME);
            if backend_dir.join(BACKEND_SCRIPT).exists() {
                return backend_dir;
            }

            let mut current = exe_dir;
            for _ in 0..3 {
                if let Some(parent) = current.parent() {
                    let dev_backend_dir = parent.join(BACKEND_DIR_NAME);
                    if dev_backend_dir.join(BACKEND_SCRIPT).exists() {
                        log::debug!("Found backend at: {:?}", dev_backend_dir);
                        return dev_backend_dir;
                    }
                    current = parent;
                }
            }
        }
    }

    let cwd_backend = std::env::current_dir()
        .unwrap_or_default()
        .join(BACKEND_DIR_NAME);

    log::debug!("Fallback to current dir backend: {:?}", cwd_backend);
    cwd_backend
}

/// Build the launch plan for this session.
/// An explicit `backend_command` in settings wins over both built-in layouts.
pub fn resolve_launch_plan(settings: &Settings, resource_dir: Option<&Path>, packaged: bool) -> LaunchPlan {
    if let Some(command) = settings.backend_command.as_deref().filter(|c| !c.trim().is_empty()) {
        return LaunchPlan {
            program: command.to_string(),
            args: settings.backend_args.clone(),
            cwd: None,
            packaged,
        };
    }

    if packaged {
        let base = resource_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
        return LaunchPlan {
            program: base
                .join(PACKAGED_BACKEND_EXECUTABLE)
                .to_string_lossy()
                .to_string(),
            args: Vec::new(),
            cwd: Some(base),
            packaged: true,
        };
    }

    let backend_dir = get_backend_dir();
    LaunchPlan {
        program: get_python_path(),
        args: vec![backend_dir.join(BACKEND_SCRIPT).to_string_lossy().to_string()],
        cwd: Some(backend_dir),
        packaged: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_override_wins() {
        let settings = Settings {
            backend_command: Some("uv".to_string()),
            backend_args: vec!["run".to_string(), "app.py".to_string()],
            ..Settings::default()
        };

        let plan = resolve_launch_plan(&settings, Some(Path::new("/opt/sastra")), true);

        assert_eq!(plan.program, "uv");
        assert_eq!(plan.args, vec!["run", "app.py"]);
        assert!(plan.cwd.is_none());
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let settings = Settings {
            backend_command: Some("  ".to_string()),
            ..Settings::default()
        };

        let plan = resolve_launch_plan(&settings, Some(Path::new("/opt/sastra")), true);
        assert!(plan.program.ends_with(PACKAGED_BACKEND_EXECUTABLE));
    }

    #[test]
    fn test_packaged_plan_uses_resource_dir() {
        let plan = resolve_launch_plan(&Settings::default(), Some(Path::new("/opt/sastra")), true);

        assert_eq!(
            PathBuf::from(&plan.program),
            Path::new("/opt/sastra").join(PACKAGED_BACKEND_EXECUTABLE)
        );
        assert!(plan.args.is_empty());
        assert!(plan.packaged);
    }

    #[test]
    fn test_dev_plan_runs_script_with_interpreter() {
        let plan = resolve_launch_plan(&Settings::default(), None, false);

        assert!(!plan.packaged);
        assert_eq!(plan.args.len(), 1);
        assert!(plan.args[0].ends_with(BACKEND_SCRIPT));
        assert!(plan.program.starts_with("py"));
    }
}
