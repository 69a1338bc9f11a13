// SPDX-License-Identifier: MIT
//
// ns-term — the terminal and git panels of notesharp.
//
// Everything here runs commands on the host. The editing core never
// depends on this crate: the binary hands owned snapshots (a command
// string, a working directory) to worker threads and gets results back
// over a bounded channel that its single event loop drains.
//
//   terminal.rs  built-ins, history, path completion, shell jobs
//   git.rs       repository detection, porcelain status, add/commit/pull/push
//   worker.rs    named job threads + bounded result channel

pub mod git;
pub mod terminal;
pub mod worker;
