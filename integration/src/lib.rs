pub mod certificates;
pub mod test_server;
