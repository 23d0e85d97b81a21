//! The concurrent interpreter kernel and the single-threaded
//! [`Interpreter`] it wraps.
//!
//! A [`Kernel`] owns one worker thread running a parse-and-evaluate loop
//! over its own [`Environment`]. Callers talk to it exclusively through
//! [`SyncQueue`]s: one tagged request queue inbound, a result queue and an
//! error queue outbound. The worker blocks on the request queue when idle
//! and replies exactly once per submitted program, so results come back in
//! submission order.

use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::environment::Environment;
use crate::error::SemanticError;
use crate::eval::eval;
use crate::expression::Expression;
use crate::interrupt::InterruptFlag;
use crate::parse::{parse_source, ParseError};
use crate::queue::SyncQueue;

/// Message displayed and queued when a submitted program fails to parse.
pub const PARSE_FAILURE_MESSAGE: &str = "Error: Invalid Program. Could not parse.";

/// Single-threaded embedding of the language: parse state plus one
/// environment, for callers that do not need the kernel thread.
#[derive(Default)]
pub struct Interpreter {
    ast: Option<Expression>,
    env: Environment,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::default()
    }

    /// Parse a complete program, holding its tree for [`evaluate`](Self::evaluate).
    pub fn parse_text(&mut self, text: &str) -> Result<(), ParseError> {
        self.ast = Some(parse_source(text)?);
        Ok(())
    }

    /// Evaluate the last parsed program against the interpreter's
    /// environment.
    pub fn evaluate(&mut self) -> Result<Expression, SemanticError> {
        match self.ast.take() {
            Some(ast) => eval(&ast, &mut self.env),
            None => Ok(Expression::none()),
        }
    }

    /// Parse and evaluate in one step, mapping parse failures to their
    /// display message.
    pub fn run(&mut self, text: &str) -> Result<Expression, String> {
        if self.parse_text(text).is_err() {
            return Err(PARSE_FAILURE_MESSAGE.to_string());
        }
        self.evaluate().map_err(|err| err.to_string())
    }
}

/// A control or data message for the kernel worker.
pub enum KernelRequest {
    Submit(String),
    Stop,
    Reset,
    Exit,
}

/// Handle to a running kernel worker thread.
pub struct Kernel {
    requests: SyncQueue<KernelRequest>,
    results: SyncQueue<Expression>,
    errors: SyncQueue<String>,
    interrupt: InterruptFlag,
    worker: Option<JoinHandle<()>>,
}

impl Kernel {
    /// Spawn a worker with a fresh default environment. Each kernel
    /// carries its own cancellation flag.
    pub fn start() -> Self {
        let requests = SyncQueue::new();
        let results = SyncQueue::new();
        let errors = SyncQueue::new();
        let interrupt = InterruptFlag::new();

        let worker_requests = requests.clone();
        let worker_results = results.clone();
        let worker_errors = errors.clone();
        let worker_interrupt = interrupt.clone();
        let worker = thread::spawn(move || {
            worker_loop(
                worker_requests,
                worker_results,
                worker_errors,
                worker_interrupt,
            );
        });
        debug!("kernel worker started");

        Kernel {
            requests,
            results,
            errors,
            interrupt,
            worker: Some(worker),
        }
    }

    /// Queue one program for evaluation. Exactly one result or error will
    /// eventually appear for it, in submission order.
    pub fn submit(&self, text: &str) {
        self.requests.push(KernelRequest::Submit(text.to_string()));
    }

    pub fn try_result(&self) -> Option<Expression> {
        self.results.try_pop()
    }

    pub fn try_error(&self) -> Option<String> {
        self.errors.try_pop()
    }

    /// Block until the next result expression arrives.
    pub fn wait_result(&self) -> Expression {
        self.results.wait_pop()
    }

    /// Block until the next error message arrives.
    pub fn wait_error(&self) -> String {
        self.errors.wait_pop()
    }

    /// Request cancellation of the evaluation currently in flight on this
    /// kernel's worker. The flag is polled by `range` and the
    /// continuous-plot loops; the aborted program reports on the error
    /// queue. Other kernels are unaffected.
    pub fn interrupt(&self) {
        self.interrupt.raise();
    }

    /// Stop the worker and join it. Submissions queued ahead of the stop
    /// are still processed; the worker exits once it reaches the stop
    /// request.
    pub fn stop(mut self) {
        self.shutdown(KernelRequest::Stop);
    }

    fn shutdown(&mut self, request: KernelRequest) {
        if let Some(worker) = self.worker.take() {
            self.requests.push(request);
            let _ = worker.join();
            debug!("kernel worker stopped");
        }
    }
}

impl Drop for Kernel {
    fn drop(&mut self) {
        self.shutdown(KernelRequest::Exit);
    }
}

fn worker_loop(
    requests: SyncQueue<KernelRequest>,
    results: SyncQueue<Expression>,
    errors: SyncQueue<String>,
    interrupt: InterruptFlag,
) {
    let mut env = Environment::with_interrupt(interrupt.clone());
    loop {
        match requests.wait_pop() {
            KernelRequest::Submit(text) => {
                interrupt.clear();
                match parse_source(&text) {
                    Err(_) => errors.push(PARSE_FAILURE_MESSAGE.to_string()),
                    Ok(program) => match eval(&program, &mut env) {
                        Ok(result) => results.push(result),
                        Err(err) => errors.push(err.to_string()),
                    },
                }
            }
            KernelRequest::Stop | KernelRequest::Reset | KernelRequest::Exit => {
                debug!("kernel worker exiting on control request");
                break;
            }
        }
    }
}
