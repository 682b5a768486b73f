pub mod mapper;
pub mod synchronizer;
