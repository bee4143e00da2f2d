pub mod transportapi;
