use log::debug;

use super::error::ExecError;
use super::terminal::{self, Foreground, Groups, SavedStdin};
use super::{launcher, wait};
use crate::shell::command::{CommandLine, NodeId};

pub fn run_pipeline(
    line: &mut CommandLine,
    head: NodeId,
    groups: &Groups,
) -> Result<NodeId, ExecError> {
    let pgid = terminal::lead_own_group();
    let last = line.pipeline_end(head);
    let stages: Vec<NodeId> = line.span(head, last).collect();

    // 先交出终端再启动，否则读终端的阶段会在交接前收到 SIGTTIN 而停止
    let foreground = Foreground::claim(pgid, groups);
    {
        let _stdin = SavedStdin::save()?;
        for id in stages {
            launcher::launch(line, id, pgid)?;
        }
    }

    let pid = line.node(last).pid.ok_or(ExecError::NotLaunched)?;
    let outcome = wait::wait_for(pid)?;
    drop(foreground);
    // 中间阶段不在这里等待，由 shell 的回收循环或 init 处理
    line.node_mut(last).outcome = outcome;
    debug!("管道结束: {}", outcome);
    Ok(last)
}
