mod assistant;
mod executor;
mod mailbox;
mod speech;
mod support;
