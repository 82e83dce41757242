#![allow(dead_code)]

use std::{
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process::{Child, ChildStderr, ExitStatus},
    thread,
    time::{Duration, Instant},
};

/// Writes a `/bin/sh` worker script into `dir` and returns its path.
pub fn write_worker(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("worker.sh");
    fs::write(&path, body).expect("failed to write worker script");
    path
}

/// Worker script that records its `$0` and arguments, one per line, then
/// exits with `code`.
pub fn recording_worker(dir: &Path, code: i32) -> (PathBuf, PathBuf) {
    let args_file = dir.join("args.txt");
    let script = write_worker(
        dir,
        &format!(
            "printf '%s\\n' \"$0\" \"$@\" > '{}'\nexit {code}\n",
            args_file.display()
        ),
    );
    (script, args_file)
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read {:?}: {err}", path))
        .lines()
        .map(|line| line.to_string())
        .collect()
}

pub fn wait_for_path(path: &Path) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if path.exists() {
            return;
        }
        thread::sleep(Duration::from_millis(100));
    }
    panic!("Timed out waiting for {:?} to exist", path);
}

/// Waits for a file holding a PID and returns it.
pub fn wait_for_pid_file(path: &Path) -> i32 {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(content) = fs::read_to_string(path)
            && let Ok(pid) = content.trim().parse::<i32>()
        {
            return pid;
        }

        if Instant::now() >= deadline {
            panic!("Timed out waiting for PID in {:?}", path);
        }

        thread::sleep(Duration::from_millis(100));
    }
}

/// Reads stderr lines until one contains `needle`, returning everything read.
pub fn read_stderr_until(stderr: &mut BufReader<ChildStderr>, needle: &str) -> String {
    let mut seen = String::new();
    loop {
        let mut line = String::new();
        let read = stderr.read_line(&mut line).expect("failed to read stderr");
        if read == 0 {
            panic!("stderr closed before '{needle}' appeared:\n{seen}");
        }
        seen.push_str(&line);
        if line.contains(needle) {
            return seen;
        }
    }
}

pub fn wait_for_exit(child: &mut Child) -> ExitStatus {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(status) = child.try_wait().expect("failed to poll launcher") {
            return status;
        }

        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("Timed out waiting for launcher to exit");
        }

        thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(target_os = "linux")]
pub fn wait_for_process_exit(pid: u32) {
    let deadline = Instant::now() + Duration::from_secs(10);
    let proc_path = PathBuf::from(format!("/proc/{}", pid));
    let stat_path = PathBuf::from(format!("/proc/{}/stat", pid));

    while Instant::now() < deadline {
        if !proc_path.exists() {
            return;
        }

        // Zombies count as exited; nobody may reap a reparented worker.
        if let Ok(stat) = fs::read_to_string(&stat_path)
            && let Some(state_start) = stat.rfind(')')
            && let Some(state_char) = stat[state_start + 1..].trim().chars().next()
            && (state_char == 'Z' || state_char == 'X')
        {
            return;
        }

        thread::sleep(Duration::from_millis(100));
    }

    panic!("Timed out waiting for PID {} to exit", pid);
}
