//! Five-column kanban board.
//!
//! The task list lives in memory ([`kanban_board::KanbanBoard`]) and every
//! mutation rewrites the whole remote collection through
//! [`repository::TaskRepository`]. Rendering works from a pure projection of
//! the list ([`projection::project`]).

pub mod app;
pub mod config;
pub mod confirm;
pub mod controller;
pub mod drag;
pub mod error;
pub mod kanban_board;
pub mod projection;
pub mod repository;
pub mod seed;
pub mod store;
pub mod task;
pub mod transfer;
pub mod ui;
