// src/system/signals.rs

//! Host signal handling.
//!
//! A listener task on the script's runtime turns SIGINT into a soft interrupt
//! and SIGQUIT into a hard one (Ctrl-C and Ctrl-Break on Windows) and hands
//! them to the [`AbortRouter`]. Once installed, those signals no longer
//! terminate the process.

use crate::core::abort_router::AbortRouter;
use crate::models::Interrupt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Starts listening for interrupts on `runtime`. Abort the returned handle to
/// stop listening.
#[cfg(unix)]
pub fn install(runtime: &Handle, router: Arc<AbortRouter>) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let _entered = runtime.enter();
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut quit = signal(SignalKind::quit())?;
    log::debug!("Installed SIGINT/SIGQUIT handlers.");

    Ok(runtime.spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = interrupt.recv() => Interrupt::Soft,
                Some(()) = quit.recv() => Interrupt::Hard,
                else => break,
            };
            router.deliver(received);
        }
    }))
}

/// Starts listening for interrupts on `runtime`. Abort the returned handle to
/// stop listening.
#[cfg(windows)]
pub fn install(runtime: &Handle, router: Arc<AbortRouter>) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::windows::{ctrl_break, ctrl_c};

    let _entered = runtime.enter();
    let mut interrupt = ctrl_c()?;
    let mut quit = ctrl_break()?;
    log::debug!("Installed Ctrl-C/Ctrl-Break handlers.");

    Ok(runtime.spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = interrupt.recv() => Interrupt::Soft,
                Some(()) = quit.recv() => Interrupt::Hard,
                else => break,
            };
            router.deliver(received);
        }
    }))
}
