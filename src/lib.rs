//! Interactive patch cropper: place non-overlapping fixed-size squares on
//! source images and export each one as its own image file.

pub mod logger;

pub mod app;
pub mod canvas;
pub mod cli;
pub mod controller;
pub mod error;
pub mod export;
pub mod geometry;
pub mod io;
pub mod navigator;
pub mod selection;
pub mod session;
