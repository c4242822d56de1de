//
// Copyright (c) The Radkit Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Arc;

use radkit_proto::dictionary::AttrDesc;
use serde::{Deserialize, Serialize};

// One rule entry of a users file: a subject name, the check items that
// select the entry and the reply items it contributes.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct UsersEntry {
    pub name: String,
    // Line the entry starts on.
    pub line: u32,
    // Position of the entry across all parsed files, including
    // $INCLUDEd ones.
    pub order: u32,
    pub check: Vec<AttrMap>,
    pub reply: Vec<AttrMap>,
}

// A single "attribute op value" item.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct AttrMap {
    pub attr: Arc<AttrDesc>,
    pub op: MapOp,
    pub value: RhsValue,
}

// Comparison and assignment operators of check and reply items.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum MapOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Regex,
    NotRegex,
    // Set-once assignment (":=").
    Set,
    Assign,
    Add,
}

// Right-hand side of an item, kept as written: resolution against the
// packet happens at match time, not at parse time.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum RhsValue {
    Quoted(String),
    Bareword(String),
}

// ===== impl MapOp =====

impl MapOp {
    pub(crate) fn from_token(token: &str) -> Option<MapOp> {
        let op = match token {
            "==" => MapOp::Eq,
            "!=" => MapOp::Ne,
            "<" => MapOp::Lt,
            "<=" => MapOp::Le,
            ">" => MapOp::Gt,
            ">=" => MapOp::Ge,
            "=~" => MapOp::Regex,
            "!~" => MapOp::NotRegex,
            ":=" => MapOp::Set,
            "=" => MapOp::Assign,
            "+=" => MapOp::Add,
            _ => return None,
        };
        Some(op)
    }

    // Operators allowed in a check item list.
    pub fn is_check_op(&self) -> bool {
        !matches!(self, MapOp::Assign | MapOp::Add)
    }

    // Operators allowed in a reply item list.
    pub fn is_reply_op(&self) -> bool {
        matches!(self, MapOp::Assign | MapOp::Set | MapOp::Add)
    }
}

impl std::fmt::Display for MapOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            MapOp::Eq => "==",
            MapOp::Ne => "!=",
            MapOp::Lt => "<",
            MapOp::Le => "<=",
            MapOp::Gt => ">",
            MapOp::Ge => ">=",
            MapOp::Regex => "=~",
            MapOp::NotRegex => "!~",
            MapOp::Set => ":=",
            MapOp::Assign => "=",
            MapOp::Add => "+=",
        };
        write!(f, "{token}")
    }
}

// ===== impl RhsValue =====

impl RhsValue {
    pub fn as_str(&self) -> &str {
        match self {
            RhsValue::Quoted(value) => value,
            RhsValue::Bareword(value) => value,
        }
    }
}
