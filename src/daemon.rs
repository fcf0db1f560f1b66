//! PID-file bookkeeping for the background server.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::{Pid, System};

use crate::config::project_dirs;

fn data_dir() -> Result<PathBuf> {
    let dirs = project_dirs()?;
    let dir = dirs.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn pid_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("server.pid"))
}

/// Where the detached server's stdout/stderr go.
pub fn log_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("server.log"))
}

fn read_pid(path: &Path) -> Result<u32> {
    let raw = fs::read_to_string(path)?;
    raw.trim()
        .parse::<u32>()
        .with_context(|| format!("PID file {} is corrupt", path.display()))
}

/// The PID of the background server, if one is alive.
pub fn running_pid() -> Result<Option<u32>> {
    let pid_file = pid_path()?;
    if !pid_file.exists() {
        return Ok(None);
    }
    let pid = read_pid(&pid_file)?;
    let system = System::new_all();
    Ok(system.process(Pid::from_u32(pid)).map(|_| pid))
}

/// Kills the background server and removes its PID file.
pub fn stop() -> Result<()> {
    let pid_file = pid_path()?;
    if !pid_file.exists() {
        println!("Server is not running (no PID file).");
        return Ok(());
    }

    let pid = read_pid(&pid_file)?;
    let system = System::new_all();
    match system.process(Pid::from_u32(pid)) {
        Some(process) => {
            println!("Stopping server process with PID: {}", pid);
            process.kill();
        }
        None => println!("Process with PID {} not found. It may have already stopped.", pid),
    }
    fs::remove_file(&pid_file)?;
    println!("Server stopped.");
    Ok(())
}

pub fn status() -> Result<()> {
    match running_pid()? {
        Some(pid) => println!("Server is running with PID: {}", pid),
        None => println!("Server is not running."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_pid_with_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.pid");
        fs::write(&path, "4242\n").unwrap();
        assert_eq!(read_pid(&path).unwrap(), 4242);
    }

    #[test]
    fn corrupt_pid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.pid");
        fs::write(&path, "not-a-pid").unwrap();
        let err = read_pid(&path).unwrap_err();
        assert!(err.to_string().contains("is corrupt"));
    }
}
