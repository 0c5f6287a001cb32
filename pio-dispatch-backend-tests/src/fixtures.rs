mod client_options;
mod scenarios;
