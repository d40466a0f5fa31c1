crate::define_tag_enum! {
    /// Origin convention of a token source
    Ecosystem {
        Tailwind => "tailwind" : "Tailwind CSS" | "tailwindcss",
        Mui => "mui" : "Material UI" | "material-ui" | "material",
        Chakra => "chakra" : "Chakra UI" | "chakra-ui",
        CssVariables => "css-variables" : "CSS custom properties" | "css-vars" | "css",
        StyleDictionary => "style-dictionary" : "Style Dictionary" | "styledictionary",
        CustomJs => "custom-js" : "Token script" | "custom" | "js",
        FigmaTokens => "figma-tokens" : "Figma token export" | "figma" | "tokens-studio",
    }
}
