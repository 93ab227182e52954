// /proc/<pid>/stat and cmdline parsing

use crate::process::types::ProcessState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLine {
    pub comm: String,
    pub state: ProcessState,
    pub ppid: u32,
    pub pgrp: u32,
}

/// Parse the contents of `/proc/<pid>/stat`.
///
/// Format: `pid (comm) state ppid pgrp ...`. The command name may itself
/// contain spaces and parentheses, so it is delimited by the last `)`.
pub fn parse_stat(content: &str) -> Option<StatLine> {
    let open = content.find('(')?;
    let close = content.rfind(')')?;
    if close < open {
        return None;
    }
    let comm = content[open + 1..close].to_string();

    let fields: Vec<&str> = content[close + 1..].split_whitespace().collect();
    let state = ProcessState::from_char(fields.first()?.chars().next()?);
    let ppid = fields.get(1)?.parse().ok()?;
    let pgrp = fields.get(2)?.parse().ok()?;

    Some(StatLine {
        comm,
        state,
        ppid,
        pgrp,
    })
}

/// Name used to match a process against exclude lists.
///
/// `comm` is truncated to 15 bytes by the kernel ("Battle.net Helper.exe"
/// becomes "Battle.net Help"), so the basename of `argv[0]` wins when there is
/// one. Wine sets `argv[0]` to the Windows path of the program.
pub fn process_name(cmdline: &[u8], comm: &str) -> String {
    let argv0 = cmdline.split(|b| *b == 0).next().unwrap_or_default();
    if argv0.is_empty() {
        return comm.to_string();
    }
    let argv0 = String::from_utf8_lossy(argv0);
    let base = argv0
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() {
        comm.to_string()
    } else {
        base.to_string()
    }
}
