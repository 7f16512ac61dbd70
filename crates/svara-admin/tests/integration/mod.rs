mod gate;
mod panel;
mod repository;
mod resolver;
