//! 仪表盘会话守卫 - 每个进程最多一个 live 会话

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, Ordering};

/// 会话注册表，由进程入口持有
#[derive(Debug, Default)]
pub struct DashboardSessions {
    active: AtomicBool,
}

impl DashboardSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 占用会话；已有活跃会话时返回错误
    pub fn claim(&self) -> Result<SessionLease<'_>> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            bail!("a dashboard session is already running in this process");
        }
        Ok(SessionLease { owner: self })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// 会话租约，drop 时释放
#[derive(Debug)]
pub struct SessionLease<'a> {
    owner: &'a DashboardSessions,
}

impl SessionLease<'_> {
    /// 显式释放
    pub fn release(self) {}
}

impl Drop for SessionLease<'_> {
    fn drop(&mut self) {
        self.owner.active.store(false, Ordering::Release);
    }
}
