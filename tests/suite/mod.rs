mod forwarding;
mod scheduled;
