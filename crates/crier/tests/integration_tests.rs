use crier::*;

#[test]
fn test_basic_logging_functions() {
  info("Test info message");
  warn("Test warning message");
  error("Test error message");
  debug("Test debug message");
  success("Test success message");
  verbose("Test verbose message");
}

#[test]
fn test_multiline_messages() {
  let multiline_msg = "First line\nSecond line\nThird line";
  info(multiline_msg);
  warn(multiline_msg);
  emit(Level::Success, multiline_msg);
}

#[test]
fn test_macros_accept_format_arguments() {
  let count = 3;
  crier::info!("indexed {count} events");
  crier::warn!("{} of {} embeddings failed", 1, count);
  crier::success!("done");
}
