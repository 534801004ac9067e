// ABOUTME: Shared test helpers for integration tests
// ABOUTME: Exports the in-process axum request driver and a fault-injecting database double
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

pub mod axum_test;
pub mod faulty_database;
