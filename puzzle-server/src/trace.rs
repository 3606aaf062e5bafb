//! Abbreviated stack traces for failed solver runs
//!
//! Panics are traced by a process-wide hook that stores the trace for the
//! panicking thread; [`catch_traced`] hands it back alongside the payload.
//! Traces keep only frames with a source location outside the standard library
//! and the cargo registry, with paths shown relative to the workspace.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Once;

/// Frames kept per trace
pub const MAX_FRAMES: usize = 16;

static HOOK: Once = Once::new();

thread_local! {
    static PANIC_TRACE: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Chain a trace-recording hook in front of the current panic hook
pub fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let trace = abbreviate(&Backtrace::force_capture().to_string());
            PANIC_TRACE.with(|slot| *slot.borrow_mut() = trace);
            previous(info);
        }));
    });
}

/// Run `f`, returning the panic payload and its trace if it unwinds
///
/// The trace is empty for panics resumed from another thread, since the hook ran
/// over there.
pub fn catch_traced<R>(f: impl FnOnce() -> R) -> Result<R, (Box<dyn Any + Send>, Vec<String>)> {
    install_panic_hook();
    PANIC_TRACE.with(|slot| slot.borrow_mut().clear());
    panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| (payload, PANIC_TRACE.with(|slot| slot.take())))
}

/// Shorten a rendered [`Backtrace`] to `function (path:line:col)` entries
pub fn abbreviate(trace: &str) -> Vec<String> {
    abbreviate_under(trace, workspace_root())
}

fn abbreviate_under(trace: &str, root: &Path) -> Vec<String> {
    let mut frames = Vec::new();
    let mut function: Option<&str> = None;
    for line in trace.lines().map(str::trim) {
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(name) = function.take()
                && is_local(location)
                && !name.contains("install_panic_hook")
            {
                frames.push(format!("{name} ({})", relative(location, root)));
            }
        } else if let Some((index, name)) = line.split_once(": ")
            && !index.is_empty()
            && index.bytes().all(|b| b.is_ascii_digit())
        {
            function = Some(name);
        }
        if frames.len() == MAX_FRAMES {
            break;
        }
    }
    frames
}

fn is_local(location: &str) -> bool {
    let location = location.replace('\\', "/");
    !(location.starts_with("/rustc/")
        || location.contains("/rustlib/")
        || location.contains("/.cargo/registry/")
        || location.contains("/.cargo/git/"))
}

fn relative(location: &str, root: &Path) -> String {
    let stripped = Path::new(location)
        .strip_prefix(root)
        .map(|rest| rest.display().to_string())
        .unwrap_or_else(|_| location.to_string());
    match stripped.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => stripped,
    }
}

fn workspace_root() -> &'static Path {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.parent().unwrap_or(manifest)
}
