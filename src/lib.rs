pub mod shared {
    pub mod core {
        pub mod configuration;
        pub mod entity;
    }
    pub mod infrastructure {
        pub mod event_store;
        pub mod http;
    }
}

pub mod modules {
    pub mod eventstores {
        pub mod live_stores;
        pub mod registry;
        pub mod use_cases {
            pub mod add_entity {
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod append_entity {
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod get_entity {
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod list_eventstores {
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod push_configuration {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
    pub mod control_plane {
        pub mod catalog;
        pub mod discovery;
        pub mod publisher;
        pub mod inbound {
            pub mod http;
        }
    }
    pub mod configuration_sources {
        pub mod error;
        pub mod kubernetes;
        pub mod standalone;
    }
}

pub mod shell;
