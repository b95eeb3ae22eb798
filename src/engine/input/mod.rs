// Input handling
//
// The engine owns one `InputHandler` and feeds it winit events:
//
// ```rust
// input.process_keyboard_event(&key_event);
// if input.get_key_down(KeyCode::Space) {
//     // pressed this frame
// }
// input.reset_input_signal(); // end of frame
// ```

mod handler;
mod keys;

pub use handler::InputHandler;
pub use keys::{KeyCode, MouseButton};
