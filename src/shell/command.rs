use std::fmt;
use std::os::unix::io::RawFd;

use nix::unistd::Pid;

use super::executor::Outcome;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlOp {
    #[default]
    None,
    Pipe,
    Sequence,
    Background,
    And,
    Or,
}

impl ControlOp {
    pub fn ends_conditional(self) -> bool {
        matches!(self, ControlOp::None | ControlOp::Sequence | ControlOp::Background)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdStream {
    Stdin,
    Stdout,
    Stderr,
}

impl StdStream {
    pub fn fd(self) -> RawFd {
        match self {
            StdStream::Stdin => libc::STDIN_FILENO,
            StdStream::Stdout => libc::STDOUT_FILENO,
            StdStream::Stderr => libc::STDERR_FILENO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub target: StdStream,
    pub filename: String,
}

#[derive(Debug, Clone, Default)]
pub struct CommandNode {
    pub arguments: Vec<String>,
    pub redirections: Vec<Redirection>,
    pub op: ControlOp,
    pub next: Option<NodeId>,
    // 由启动器写入；条件链的头节点记录条件进程的 pid
    pub pid: Option<Pid>,
    pub outcome: Outcome,
}

impl CommandNode {
    pub fn program(&self) -> Option<&str> {
        self.arguments.first().map(String::as_str)
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_words::join(&self.arguments))?;
        for redirection in &self.redirections {
            let op = match redirection.target {
                StdStream::Stdin => "<",
                StdStream::Stdout => ">",
                StdStream::Stderr => "2>",
            };
            write!(f, " {} {}", op, shell_words::quote(&redirection.filename))?;
        }
        Ok(())
    }
}

// 所有节点存放在同一个 Vec 中，通过 next 下标串联，析构不递归
#[derive(Debug, Default)]
pub struct CommandLine {
    nodes: Vec<CommandNode>,
}

impl CommandLine {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn push(&mut self, node: CommandNode) -> NodeId {
        let id = self.nodes.len();
        if let Some(tail) = self.nodes.last_mut() {
            tail.next = Some(id);
        }
        self.nodes.push(node);
        id
    }

    pub fn head(&self) -> Option<NodeId> {
        (!self.is_empty()).then_some(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut CommandNode {
        &mut self.nodes[id]
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].next
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut CommandNode> {
        self.nodes.last_mut()
    }

    pub fn pipeline_end(&self, start: NodeId) -> NodeId {
        let mut id = start;
        while self.nodes[id].op == ControlOp::Pipe {
            match self.nodes[id].next {
                Some(next) => id = next,
                None => break,
            }
        }
        id
    }

    pub fn conditional_end(&self, start: NodeId) -> NodeId {
        let mut id = start;
        while !self.nodes[id].op.ends_conditional() {
            match self.nodes[id].next {
                Some(next) => id = next,
                None => break,
            }
        }
        id
    }

    // 包含 start 和 end
    pub fn span(&self, start: NodeId, end: NodeId) -> Span<'_> {
        Span {
            line: self,
            cursor: Some(start),
            end,
        }
    }
}

pub struct Span<'a> {
    line: &'a CommandLine,
    cursor: Option<NodeId>,
    end: NodeId,
}

impl Iterator for Span<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cursor?;
        self.cursor = if id == self.end {
            None
        } else {
            self.line.next(id)
        };
        Some(id)
    }
}
