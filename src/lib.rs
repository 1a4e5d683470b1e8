// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod ai;
pub mod aggregation;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod csv_io;
pub mod db;
pub mod demo;
pub mod error;
pub mod filter;
pub mod models;
pub mod notifications;
pub mod state;
pub mod sync;
pub mod utils;
