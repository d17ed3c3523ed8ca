use log::{debug, error};
use nix::unistd::{fork, ForkResult, Pid};

use super::error::ExecError;
use super::terminal::{self, Groups};
use super::wait::short_circuits;
use super::{builtin, child, pipeline};
use crate::shell::command::{CommandLine, ControlOp, NodeId};

// 以整条管道为单位跳过同类连接，返回最后一条被跳过的管道的末节点
fn skip_links(line: &CommandLine, mut last: NodeId, end: NodeId, kind: ControlOp) -> NodeId {
    while last != end && line.node(last).op == kind {
        let Some(start) = line.next(last) else {
            break;
        };
        debug!("短路跳过: {}", line.node(start));
        last = line.pipeline_end(start);
    }
    last
}

fn evaluate(
    line: &mut CommandLine,
    head: NodeId,
    end: NodeId,
    groups: &Groups,
) -> Result<(), ExecError> {
    let mut cursor = Some(head);
    while let Some(start) = cursor {
        let mut last = pipeline::run_pipeline(line, start, groups)?;
        if last == end {
            break;
        }

        let node = line.node(last);
        if short_circuits(node.op, node.outcome) {
            last = skip_links(line, last, end, node.op);
            if last == end {
                break;
            }
        }
        cursor = line.next(last);
    }
    Ok(())
}

// cd 在 fork 之前于当前进程执行，之后的条件链和重定向才能看到新目录
pub fn run_conditional(
    line: &mut CommandLine,
    head: NodeId,
    groups: &Groups,
) -> Result<Pid, ExecError> {
    let end = line.conditional_end(head);
    builtin::change_directories(line, head, end);

    // SAFETY: 子进程不会返回调用方，只通过 `_exit` 退出
    match unsafe { fork() }.map_err(ExecError::Fork)? {
        ForkResult::Child => {
            terminal::lead_own_group();
            let code = match evaluate(line, head, end, groups) {
                Ok(()) => 0,
                Err(e) => {
                    error!("条件执行失败: {}", e);
                    child::report(&format!("pipesh: {}\n", e));
                    1
                }
            };
            child::exit_immediately(code)
        }
        ForkResult::Parent { child } => {
            terminal::join_group(child, child);
            line.node_mut(head).pid = Some(child);
            Ok(child)
        }
    }
}
