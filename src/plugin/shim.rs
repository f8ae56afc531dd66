//! Scoped capture of the host's ambient channel.
//!
//! A handler written against the ambient convention reads its input from the
//! host and writes its output back to the host. To run one on behalf of a
//! structured caller, the input is swapped for a fixed string and the output
//! for a capture buffer, then both are put back. The restore happens in
//! `Drop`, so it also runs when the handler panics.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::host::{Bindings, PluginHost};

/// Raw result of one handler run. Consumed by the classifier right away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOutcome {
    pub status_code: i32,
    pub captured_text: String,
}

/// Puts the prior bindings back, then releases the window.
struct RestoreGuard<'a> {
    host: &'a PluginHost,
    prior: Option<Bindings>,
    _window: MutexGuard<'a, ()>,
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        if let Some(prior) = self.prior.take() {
            self.host.swap_bindings(prior);
        }
    }
}

/// Run `handler` with `input_text` as its input and capture what it writes.
///
/// Only one window can be open per host at a time: a second caller blocks
/// until the first has restored the bindings. The last write wins when the
/// handler writes more than once; no write captures an empty string.
pub fn with_captured_channel<F>(host: &PluginHost, input_text: &str, handler: F) -> HandlerOutcome
where
    F: FnOnce(&PluginHost) -> i32,
{
    let window = host.lock_window();

    let captured = Arc::new(Mutex::new(String::new()));
    let input_text = input_text.to_string();
    let sink = Arc::clone(&captured);
    let prior = host.swap_bindings(Bindings {
        input: Arc::new(move || Ok(input_text.clone())),
        output: Arc::new(move |content: &str| *sink.lock() = content.to_string()),
    });

    let guard = RestoreGuard {
        host,
        prior: Some(prior),
        _window: window,
    };

    let status_code = handler(host);
    drop(guard);

    let captured_text = std::mem::take(&mut *captured.lock());
    HandlerOutcome {
        status_code,
        captured_text,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::calendar::http::stub::StubHttp;
    use crate::config::CalendarSettings;
    use crate::plugin::host::testing::{Recorder, fixed_input};

    fn bound_host(recorder: &Recorder) -> PluginHost {
        PluginHost::new(
            Arc::new(StubHttp::new()),
            HashMap::new(),
            CalendarSettings::default(),
        )
        .with_bindings(Bindings {
            input: fixed_input("top-level"),
            output: recorder.sink(),
        })
    }

    #[test]
    fn test_handler_sees_input_and_output_is_captured() {
        let recorder = Recorder::default();
        let host = bound_host(&recorder);

        let outcome = with_captured_channel(&host, r#"{"a":1}"#, |h| {
            let input = h.input_string().unwrap();
            h.output_string(&format!("echo {input}"));
            0
        });

        assert_eq!(outcome.status_code, 0);
        assert_eq!(outcome.captured_text, r#"echo {"a":1}"#);
        assert!(recorder.writes().is_empty(), "capture must not reach the real sink");
    }

    #[test]
    fn test_last_write_wins() {
        let host = bound_host(&Recorder::default());
        let outcome = with_captured_channel(&host, "", |h| {
            h.output_string("first");
            h.output_string("second");
            1
        });
        assert_eq!(outcome.status_code, 1);
        assert_eq!(outcome.captured_text, "second");
    }

    #[test]
    fn test_restores_after_normal_return() {
        let recorder = Recorder::default();
        let host = bound_host(&recorder);

        let first = with_captured_channel(&host, "one", |h| {
            let input = h.input_string().unwrap();
            h.output_string(&input);
            0
        });
        let second = with_captured_channel(&host, "two", |h| {
            let input = h.input_string().unwrap();
            h.output_string(&input);
            0
        });

        assert_eq!(first.captured_text, "one");
        assert_eq!(second.captured_text, "two");
        assert_eq!(host.input_string().unwrap(), "top-level");
        host.output_string("after");
        assert_eq!(recorder.writes(), vec!["after"]);
    }

    #[test]
    fn test_restores_after_panic() {
        let recorder = Recorder::default();
        let host = bound_host(&recorder);

        let result = catch_unwind(AssertUnwindSafe(|| {
            with_captured_channel(&host, "doomed", |h| {
                h.output_string("partial");
                panic!("handler blew up");
            })
        }));
        assert!(result.is_err());

        assert_eq!(host.input_string().unwrap(), "top-level");

        // The window was released too: the next dispatch runs with its own input.
        let next = with_captured_channel(&host, "fresh", |h| {
            let input = h.input_string().unwrap();
            h.output_string(&input);
            0
        });
        assert_eq!(next.captured_text, "fresh");

        host.output_string("after");
        assert_eq!(recorder.writes(), vec!["after"]);
    }

    #[test]
    fn test_no_output_captures_empty_string() {
        let host = bound_host(&Recorder::default());
        let outcome = with_captured_channel(&host, "x", |_| 0);
        assert_eq!(outcome.captured_text, "");
    }

    #[test]
    fn test_windows_do_not_interleave() {
        let host = Arc::new(bound_host(&Recorder::default()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let host = Arc::clone(&host);
                thread::spawn(move || {
                    let input = format!("call-{i}");
                    with_captured_channel(&host, &input, |h| {
                        let seen = h.input_string().unwrap();
                        thread::sleep(Duration::from_millis(2));
                        // Still our input after yielding the CPU.
                        let again = h.input_string().unwrap();
                        h.output_string(&format!("{seen}|{again}"));
                        0
                    })
                    .captured_text
                        == format!("{input}|{input}")
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(host.input_string().unwrap(), "top-level");
    }
}
