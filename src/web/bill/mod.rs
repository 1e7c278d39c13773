pub mod data;
pub mod rest;
