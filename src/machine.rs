//! The tape machine that executes a validated [`Program`].
//!
//! Behaviors:
//! - Memory tape of 30,000 cells initialized to 0.
//! - The data pointer wraps around at both ends of the tape.
//! - Cell arithmetic wraps modulo 256.
//! - `.` emits the character whose code point is the current cell.
//! - `,` stores the code point (mod 256) of one input character. When input
//!   is exhausted the cell is set to 0, a notice is raised, and execution
//!   continues.
//!
//! The machine does no I/O of its own. Output, input, notices and trace rows
//! all go through hooks; with no hook set, output and trace rows are dropped
//! and every `,` reads as exhausted input.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::brackets::JumpTable;
use crate::diagnostic::Diagnostic;
use crate::error::InmError;
use crate::tokenizer::Program;

/// Number of cells on the tape.
pub const TAPE_LEN: usize = 30_000;

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Instructions executed.
    pub steps: usize,
    /// `,` instructions that found no input.
    pub exhausted_reads: usize,
}

/// One executed instruction, as seen by a trace run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRow {
    pub step: usize,
    /// Instruction index after the step, so a taken jump shows its target.
    pub ip: usize,
    pub pointer: usize,
    pub cell: u8,
    pub instr: char,
    pub action: String,
}

type OutputSink = Box<dyn FnMut(char) + Send>;
type InputProvider = Box<dyn FnMut() -> Option<char> + Send>;
type NoticeSink = Box<dyn FnMut(&Diagnostic) + Send>;
type TraceSink = Box<dyn FnMut(&TraceRow) + Send>;

/// A single execution: the program, its jump table, and a private tape.
pub struct Machine {
    program: Program,
    jumps: JumpTable,
    memory: Vec<u8>,
    pointer: usize,
    // Optional hooks:
    output_sink: Option<OutputSink>,
    input_provider: Option<InputProvider>,
    notice_sink: Option<NoticeSink>,
    trace_sink: Option<TraceSink>,
}

impl Machine {
    /// Create a machine with a 30,000 cell tape.
    ///
    /// Fails if the program's brackets do not match, so an invalid program
    /// can never be executed.
    pub fn new(program: Program) -> Result<Self, InmError> {
        Self::with_memory(program, TAPE_LEN)
    }

    /// Create a machine with a custom tape length (at least one cell).
    pub fn with_memory(program: Program, memory_size: usize) -> Result<Self, InmError> {
        let jumps = JumpTable::build(&program)?;
        Ok(Self {
            program,
            jumps,
            memory: vec![0; memory_size.max(1)],
            pointer: 0,
            output_sink: None,
            input_provider: None,
            notice_sink: None,
            trace_sink: None,
        })
    }

    /// Provide an output sink for '.'. Without one, output is discarded.
    pub fn set_output_sink<F>(&mut self, sink: F)
    where
        F: FnMut(char) + Send + 'static,
    {
        self.output_sink = Some(Box::new(sink));
    }

    /// Provide an input provider for ','. Returning None means input is
    /// exhausted; without a provider every read is exhausted.
    pub fn set_input_provider<F>(&mut self, provider: F)
    where
        F: FnMut() -> Option<char> + Send + 'static,
    {
        self.input_provider = Some(Box::new(provider));
    }

    /// Receive non-fatal notices (exhausted input) as they happen.
    pub fn set_notice_sink<F>(&mut self, sink: F)
    where
        F: FnMut(&Diagnostic) + Send + 'static,
    {
        self.notice_sink = Some(Box::new(sink));
    }

    /// Receive one row per executed instruction during a trace run.
    pub fn set_trace_sink<F>(&mut self, sink: F)
    where
        F: FnMut(&TraceRow) + Send + 'static,
    {
        self.trace_sink = Some(Box::new(sink));
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cell(&self, index: usize) -> Option<u8> {
        self.memory.get(index).copied()
    }

    pub fn tape(&self) -> &[u8] {
        &self.memory
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Internal executor shared by the public run methods.
    fn execute(
        &mut self,
        trace: bool,
        step_control: Option<&StepControl>,
    ) -> Result<RunSummary, InmError> {
        let code = self.program.instructions().to_vec();
        let code_len = code.len();
        let tape_len = self.memory.len();
        let mut pc = 0usize;
        let mut summary = RunSummary::default();

        while pc < code_len {
            if let Some(ctrl) = step_control {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    return Err(InmError::Canceled);
                }
                if let Some(max) = ctrl.max_steps {
                    if summary.steps >= max {
                        return Err(InmError::StepLimitExceeded { limit: max });
                    }
                }
            }

            let instr = code[pc];
            let (ptr_before, cell_before) = (self.pointer, self.memory[self.pointer]);
            let mut action: Option<String> = if trace { Some(String::new()) } else { None };

            match instr {
                '>' => {
                    self.pointer = (self.pointer + 1) % tape_len;
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer head to index {}", self.pointer); }
                }
                '<' => {
                    self.pointer = (self.pointer + tape_len - 1) % tape_len;
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer head to index {}", self.pointer); }
                }
                '+' => {
                    let after = cell_before.wrapping_add(1);
                    self.memory[self.pointer] = after;
                    if let Some(a) = action.as_mut() { *a = format!("Increment cell[{}] from {} to {}", ptr_before, cell_before, after); }
                }
                '-' => {
                    let after = cell_before.wrapping_sub(1);
                    self.memory[self.pointer] = after;
                    if let Some(a) = action.as_mut() { *a = format!("Decrement cell[{}] from {} to {}", ptr_before, cell_before, after); }
                }
                '.' => {
                    let ch = char::from(cell_before);
                    if let Some(a) = action.as_mut() {
                        *a = format!("Output {:?} (suppressed in trace)", ch);
                    } else if let Some(sink) = self.output_sink.as_mut() {
                        (sink)(ch);
                    }
                }
                ',' => {
                    let read = if trace {
                        None // simulate exhausted input
                    } else {
                        self.input_provider.as_mut().and_then(|provider| (provider)())
                    };

                    match read {
                        // Cells are 8 bits wide; wider code points keep their low byte.
                        Some(ch) => self.memory[self.pointer] = (u32::from(ch) & 0xFF) as u8,
                        None => {
                            self.memory[self.pointer] = 0;
                            summary.exhausted_reads += 1;
                            let notice = Diagnostic::InputExhausted { ip: pc };
                            tracing::debug!(ip = pc, "input exhausted");
                            if let Some(sink) = self.notice_sink.as_mut() {
                                (sink)(&notice);
                            }
                        }
                    }
                    if let Some(a) = action.as_mut() {
                        *a = format!("Read input -> simulated EOF (set cell[{}] to 0)", ptr_before);
                    }
                }
                '[' => {
                    if cell_before == 0 {
                        let j = self.jumps.target(pc);
                        if let Some(a) = action.as_mut() { *a = format!("Cell is 0; jump forward to matching ']' at IP {}", j); }
                        pc = j;
                    } else if let Some(a) = action.as_mut() {
                        *a = "Enter loop (cell != 0)".to_string();
                    }
                }
                ']' => {
                    if cell_before != 0 {
                        let j = self.jumps.target(pc);
                        if let Some(a) = action.as_mut() { *a = format!("Cell != 0; jump back to matching '[' at IP {}", j); }
                        pc = j;
                    } else if let Some(a) = action.as_mut() {
                        *a = "Exit loop (cell is 0)".to_string();
                    }
                }
                // Programs only ever hold the eight instruction codes.
                _ => {}
            }

            if let (Some(action), Some(sink)) = (action, self.trace_sink.as_mut()) {
                (sink)(&TraceRow {
                    step: summary.steps,
                    ip: pc,
                    pointer: ptr_before,
                    cell: cell_before,
                    instr,
                    action,
                });
            }

            summary.steps += 1;
            pc += 1;
        }

        tracing::debug!(
            steps = summary.steps,
            exhausted_reads = summary.exhausted_reads,
            "program halted"
        );
        Ok(summary)
    }

    /// Execute the program until it halts. There is no step limit.
    pub fn run(&mut self) -> Result<RunSummary, InmError> {
        self.execute(false, None)
    }

    /// Trace-run the program, sending a [`TraceRow`] per step to the trace
    /// sink instead of producing I/O side effects. The machine state advances
    /// exactly as it would during a real run, but:
    /// - '.' does not print the character; the action is logged instead
    /// - ',' does not read input; it behaves as if input were exhausted
    pub fn run_trace(&mut self) -> Result<RunSummary, InmError> {
        self.execute(true, None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn run_with_control(&mut self, step_control: StepControl) -> Result<RunSummary, InmError> {
        self.execute(false, Some(&step_control))
    }

    /// Trace-run with cooperative cancellation and optional step limit.
    pub fn run_trace_with_control(&mut self, step_control: StepControl) -> Result<RunSummary, InmError> {
        self.execute(true, Some(&step_control))
    }
}
