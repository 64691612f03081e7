pub mod gruvbox {
    use nu_ansi_term::Color;
    pub struct Dark;
    impl Dark {
        // Base colors
        pub const FG: Color = Color::Rgb(235, 219, 178);
        pub const GRAY: Color = Color::Rgb(146, 131, 116); // Subtle dim

        // Accents
        pub const RED: Color = Color::Rgb(251, 73, 52);
        pub const GREEN: Color = Color::Rgb(184, 187, 38);
        pub const YELLOW: Color = Color::Rgb(250, 189, 47);
        pub const BLUE: Color = Color::Rgb(131, 165, 152);
        pub const PURPLE: Color = Color::Rgb(211, 134, 155);
        pub const AQUA: Color = Color::Rgb(142, 192, 124);
        pub const ORANGE: Color = Color::Rgb(254, 128, 25);
    }
}
