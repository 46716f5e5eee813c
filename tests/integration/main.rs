mod common;

mod amazon_service_test;
