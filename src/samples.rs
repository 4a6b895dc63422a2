//! Built-in sample sources shown when a language is selected.
//!
//! The snippets are deliberately under-indented so a formatting pass has
//! visible work to do.

use crate::language::Language;

/// Sample C program.
pub const C_SAMPLE: &str = r#"#include <stdio.h>

int main() {
int x=5,y=10;
if(x<y){
printf("Hello, World!\n");
for(int i=0;i<x;i++){
printf("i: %d\n",i);
}
}
return 0;
}"#;

/// Sample C++ program.
pub const CPP_SAMPLE: &str = r#"#include <iostream>
#include <vector>
#include <algorithm>

class Example {
public:
Example(const std::vector<int>& data) : data_(data) {}

void process() {
std::sort(data_.begin(),data_.end());
for(const auto& item:data_) {
if(item>0) {
std::cout<<"Positive: "<<item<<std::endl;
}
}
}

private:
std::vector<int> data_;
};"#;

/// Sample source for the given language.
pub fn sample_for(language: Language) -> &'static str {
    match language {
        Language::C => C_SAMPLE,
        Language::Cpp => CPP_SAMPLE,
    }
}
