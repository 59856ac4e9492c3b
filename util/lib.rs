/*!
This crate contains small utilities shared by the other pedal crates: the [`Finite`](finite/struct.Finite.html) float wrapper and the [`Table`](table/struct.Table.html) text renderer.
*/

#![allow(clippy::tabs_in_doc_comments)]

pub mod finite;
pub mod table;
