// file: src/provision/service.rs
// version: 1.0.0
// guid: c390829d-a3f3-4630-b0d4-64f61b9a82fb

//! Phase 9: start vsftpd now and on boot

use super::PhaseContext;
use crate::system::SystemCommand;
use crate::Result;

pub async fn activate_service(ctx: &mut PhaseContext<'_>) -> Result<String> {
    ctx.system
        .run(&SystemCommand::systemctl("restart", "vsftpd"))
        .await?;
    ctx.system
        .run(&SystemCommand::systemctl("enable", "vsftpd"))
        .await?;
    Ok("vsftpd restarted and enabled at boot".to_string())
}
