use std::io;

use log::{debug, warn};

use crate::shell::command::{CommandLine, CommandNode, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
}

impl Builtin {
    pub fn lookup(node: &CommandNode) -> Option<Self> {
        match node.program()? {
            "cd" => Some(Builtin::Cd),
            _ => None,
        }
    }
}

fn builtin_cd(node: &CommandNode) -> io::Result<()> {
    let path = node.arguments.get(1).map(|s| s.as_str()).unwrap_or("~");
    let path = shellexpand::tilde(path);
    std::env::set_current_dir(path.as_ref())
}

// cd 失败只报告，不影响条件链
pub fn change_directories(line: &CommandLine, head: NodeId, end: NodeId) {
    for id in line.span(head, end) {
        let node = line.node(id);
        if Builtin::lookup(node) != Some(Builtin::Cd) {
            continue;
        }
        match builtin_cd(node) {
            Ok(()) => debug!("执行内建命令: {}", node),
            Err(e) => {
                let target = node.arguments.get(1).map(|s| s.as_str()).unwrap_or("~");
                warn!("cd 失败: {}: {}", target, e);
                eprintln!("cd: {}: {}", target, e);
            }
        }
    }
}
