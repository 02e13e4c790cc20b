//! Compiler for declarations of GPG-encrypted files.
//!
//! A declaration names a plaintext path and GPG-encrypted content. It is
//! compiled into at most three ordered actions: manage the encrypted blob,
//! manage the plaintext file, and run a `gpg --decrypt` command guarded so
//! it only runs when the blob changed or the plaintext is empty.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: manifests, declarations, defaults and validation
//! - **[`compiler`]**: pure compilation into a [`compiler::CompiledActionSet`]
//! - **[`executor`]**: the [`executor::Executor`] trait and a local implementation
//! - **[`apply`]**: ordered application with refresh and failure propagation
//! - **[`commands`]**: top-level subcommand orchestration (`validate`, `compile`, `apply`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod apply;
pub mod cli;
pub mod commands;
pub mod compiler;
pub mod config;
pub mod ensure;
pub mod error;
pub mod exec;
pub mod executor;
pub mod logging;
pub mod paths;
pub mod quote;
