//! The running Battle.net client

use std::sync::LazyLock;

use regex::Regex;

use crate::battlenet::types::CLIENT_PROCESSES;
use crate::process::{ProcessInfo, ProcessState, ProcessTable, Signal, find_by_name};

static CLIENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Battle\.net\.exe$").expect("client pattern is valid"));

static AGENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Agent\.exe$").expect("agent pattern is valid"));

/// The live client process, if any. Zombies do not count.
pub fn client_process(table: &dyn ProcessTable) -> Option<ProcessInfo> {
    find_by_name(table, &CLIENT_PATTERN)
}

/// SIGKILL the client and its agent.
pub fn kill_client(table: &dyn ProcessTable) {
    for pattern in [&*CLIENT_PATTERN, &*AGENT_PATTERN] {
        if let Some(process) = find_by_name(table, pattern) {
            tracing::warn!(pid = process.pid, name = %process.name, "Killing Battle.net process");
            if let Err(e) = table.signal(process.pid, Signal::Kill) {
                tracing::error!(pid = process.pid, "Kill failed: {e}");
            }
        }
    }
}

/// Kill the client processes among `children` once `game_exe` has settled
/// into sleep. Returns how many were signalled.
pub fn quit_client_when_playing(table: &dyn ProcessTable, children: &[ProcessInfo], game_exe: &str) -> usize {
    let playing = children
        .iter()
        .any(|p| p.name == game_exe && p.state == ProcessState::Sleeping);
    if !playing {
        return 0;
    }

    let mut killed = 0;
    for child in children
        .iter()
        .filter(|p| CLIENT_PROCESSES.contains(&p.name.as_str()) && p.state.is_alive())
    {
        tracing::debug!(pid = child.pid, name = %child.name, game = game_exe, "Game is running, stopping client");
        match table.signal(child.pid, Signal::Kill) {
            Ok(()) => killed += 1,
            Err(e) => tracing::warn!(pid = child.pid, "Kill failed: {e}"),
        }
    }
    killed
}
