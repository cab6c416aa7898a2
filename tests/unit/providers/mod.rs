/*!
 * Unit tests for provider implementations
 */

// Provider unit tests
pub mod factory_test;
pub mod gemini_test;
pub mod mock_test;
pub mod openai_test;
