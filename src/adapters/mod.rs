//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter     | Provides                  | Connects to              |
//! |-------------|---------------------------|--------------------------|
//! | `hardware`  | LightPort, BuzzerPort,    | PinBank (rppal GPIO) or  |
//! |             | sensor loops              | simulated devices        |
//! | `log_sink`  | EventSink, EventLog       | stdout                   |

pub mod hardware;
pub mod log_sink;
