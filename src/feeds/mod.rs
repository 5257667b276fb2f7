pub mod treasury_api;
