// src/error/trace.rs
//
// Call sites and stack traces for diagnostic error bodies.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

/// Frames kept from a backtrace in diagnostic responses.
pub const MAX_TRACE_FRAMES: usize = 5;

// Symbols that belong to the runtime or to failure plumbing, not to the
// code that failed.
const INTERNAL_PREFIXES: [&str; 11] = [
    "std::",
    "<std::",
    "core::",
    "<core::",
    "alloc::",
    "<alloc::",
    "anyhow::",
    "<anyhow::",
    "rust_begin_unwind",
    "__rust",
    "studio_bff::error::",
];

static FORCE_CAPTURE: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK: Once = Once::new();

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

/// File and line a failure was raised at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSite {
    pub file: String,
    pub line: u32,
}

impl From<&Location<'_>> for SourceSite {
    fn from(location: &Location<'_>) -> Self {
        Self { file: location.file().to_string(), line: location.line() }
    }
}

/// Where the last panic on this thread happened.
#[derive(Debug)]
pub struct PanicSite {
    pub site: Option<SourceSite>,
    pub trace: Vec<String>,
}

/// Capture backtraces even when `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE` are
/// unset. Switched on at startup in diagnostic mode.
pub fn force_backtraces(enabled: bool) {
    FORCE_CAPTURE.store(enabled, Ordering::Relaxed);
}

/// Frames of the current stack, already trimmed for a response body.
pub fn capture_frames() -> Vec<String> {
    let backtrace = if FORCE_CAPTURE.load(Ordering::Relaxed) {
        Backtrace::force_capture()
    } else {
        Backtrace::capture()
    };
    frames(&backtrace.to_string())
}

/// "N: symbol" lines of a rendered backtrace, skipping runtime and
/// failure-plumbing frames, at most [`MAX_TRACE_FRAMES`].
pub fn frames(rendered: &str) -> Vec<String> {
    rendered
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let (index, symbol) = line.split_once(": ")?;
            index.parse::<usize>().ok()?;
            Some((line, symbol))
        })
        .filter(|(_, symbol)| !INTERNAL_PREFIXES.iter().any(|p| symbol.starts_with(p)))
        .take(MAX_TRACE_FRAMES)
        .map(|(line, _)| line.to_string())
        .collect()
}

/// Records the location and stack of every panic for the thread that
/// raised it, then defers to the previous hook. Installed once.
pub fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let site = info.location().map(SourceSite::from);
            let trace = capture_frames();
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(PanicSite { site, trace }));
            previous(info);
        }));
    });
}

/// Takes the panic recorded on this thread, if the hook saw one.
pub fn take_panic_site() -> Option<PanicSite> {
    LAST_PANIC.with(|slot| slot.borrow_mut().take())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDERED: &str = "\
   0: std::backtrace::Backtrace::force_capture
             at /rustc/library/std/src/backtrace.rs:312:13
   1: studio_bff::error::trace::capture_frames
             at ./src/error/trace.rs:70:9
   2: <core::pin::Pin<P> as core::future::future::Future>::poll
   3: studio_bff::routes::pages::classes
             at ./src/routes/pages.rs:17:5
   4: studio_bff::routes::lessons::show_lesson
   5: axum::handler::Handler::call
   6: tower::util::oneshot::Oneshot::poll
   7: hyper::proto::h1::dispatch
   8: tokio::runtime::task::harness";

    #[test]
    fn frames_skip_runtime_and_plumbing() {
        let frames = frames(RENDERED);
        assert_eq!(
            frames,
            [
                "3: studio_bff::routes::pages::classes",
                "4: studio_bff::routes::lessons::show_lesson",
                "5: axum::handler::Handler::call",
                "6: tower::util::oneshot::Oneshot::poll",
                "7: hyper::proto::h1::dispatch",
            ]
        );
    }

    #[test]
    fn disabled_backtraces_render_no_frames() {
        assert!(frames("disabled backtrace").is_empty());
    }

    #[test]
    fn forced_capture_yields_frames_without_env_vars() {
        force_backtraces(true);
        let frames = capture_frames();
        force_backtraces(false);

        assert!(!frames.is_empty());
        assert!(frames.len() <= MAX_TRACE_FRAMES);
        assert!(frames.iter().all(|f| !f.contains("std::backtrace")));
    }

    #[test]
    fn panic_hook_records_the_panic_site() {
        install_panic_hook();
        let expected_line = line!() + 1;
        let caught = std::panic::catch_unwind(|| panic!("recorded"));
        assert!(caught.is_err());

        let recorded = take_panic_site().expect("hook recorded the panic");
        let site = recorded.site.expect("panic location");
        assert_eq!(site.file, file!());
        assert_eq!(site.line, expected_line);
        assert!(take_panic_site().is_none());
    }
}
