// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    #[default]
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "Expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("expense") {
            Some(TransactionKind::Expense)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDateTime, // when the money was spent, not when it was recorded
    pub amount: Decimal,
    pub category: String,
    pub note: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn new(date: NaiveDateTime, amount: Decimal, category: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            amount,
            category: category.into(),
            note: None,
            kind: TransactionKind::Expense,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Amount as a float for the statistics layer; anything unrepresentable counts as 0.
    pub fn amount_f64(&self) -> f64 {
        self.amount
            .to_f64()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}
