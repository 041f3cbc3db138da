/// Integration tests: the diary service end to end against file databases
/// and a mocked analysis provider
mod basic_integration;
mod analysis_provider;
mod migration;
