mod hierarchy;
mod policies;
mod trace;
