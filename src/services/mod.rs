// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

pub mod auth;
pub mod interactions;
