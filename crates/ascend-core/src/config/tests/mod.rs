mod loader_tests;
mod validator_tests;
