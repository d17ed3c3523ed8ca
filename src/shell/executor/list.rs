use log::info;

use super::conditional;
use super::error::ExecError;
use super::terminal::Groups;
use super::wait;
use crate::shell::command::{CommandLine, ControlOp};

pub fn run_list(line: &mut CommandLine, job_control: bool) -> Result<(), ExecError> {
    let groups = Groups::establish(job_control);

    let mut cursor = line.head();
    while let Some(head) = cursor {
        let end = line.conditional_end(head);
        if line.node(end).op == ControlOp::Background {
            let pid = conditional::run_conditional(line, head, &groups.detached())?;
            info!("后台执行 [{}]: {}", pid, line.node(head));
        } else {
            let pid = conditional::run_conditional(line, head, &groups)?;
            let outcome = wait::wait_for(pid)?;
            groups.reclaim();
            line.node_mut(end).outcome = outcome;
        }
        cursor = line.next(end);
    }
    Ok(())
}
